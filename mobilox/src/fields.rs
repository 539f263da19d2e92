use crate::values::{clean_text, looks_like_url, normalize_key, parse_bool, split_list, split_urls};
use roxmltree::Node;
use std::collections::HashMap;

const IMAGE_CONTAINERS: &[&str] = &["images", "bilder", "pictures", "photos", "fotos", "media"];
const IMAGE_TAGS: &[&str] = &["image", "img", "bild", "picture", "photo", "foto"];
const IMAGE_URL_KEYS: &[&str] = &["url", "src", "href", "uri", "link"];
const IMAGE_POSITION_KEYS: &[&str] = &["position", "pos", "order", "sequence", "nr", "index"];

const FEATURE_CONTAINERS: &[&str] = &["features", "ausstattung", "equipment", "options", "extras"];
const CATEGORY_TAGS: &[&str] = &["category", "categories", "kategorie", "kategorien", "tag", "tags"];
const GENERIC_ITEM_TAGS: &[&str] = &[
    "feature", "item", "option", "extra", "merkmal", "category", "kategorie", "tag",
];

const KEY_VALUE_TAGS: &[&str] = &[
    "field",
    "feld",
    "attribute",
    "attribut",
    "property",
    "param",
    "parameter",
];
const KEY_ATTRIBUTES: &[&str] = &["name", "key", "id"];

#[derive(Debug)]
struct ImageRef {
    position: Option<i64>,
    order: usize,
    url: String,
}

#[derive(Clone, Copy)]
enum TagList {
    Features,
    Categories,
}

/// Flattened view of one vehicle element, independent of whether the provider used
/// attributes, nested elements or generic key/value elements.
#[derive(Debug, Default)]
pub struct FieldMap {
    values: HashMap<String, Vec<String>>,
    /// Attributes and direct leaf children of the vehicle element itself.
    own: HashMap<String, String>,
    images: Vec<ImageRef>,
    features: Vec<String>,
    categories: Vec<String>,
}

impl FieldMap {
    pub fn from_element(vehicle: Node) -> Self {
        let mut map = Self::default();
        for attr in vehicle.attributes() {
            map.insert_own(normalize_key(attr.name()), attr.value());
        }
        for child in vehicle.children().filter(Node::is_element) {
            map.visit(child, None);
        }
        map
    }

    /// First value stored under the first of `keys` that is present.
    pub fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.values.get(*key))
            .flat_map(|values| values.iter())
            .map(String::as_str)
            .next()
    }

    /// First value along the fallback chain `keys` that `parse` accepts.
    pub fn find<T>(&self, keys: &[&str], parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        keys.iter()
            .filter_map(|key| self.values.get(*key))
            .flat_map(|values| values.iter())
            .find_map(|value| parse(value))
    }

    /// Like [`FieldMap::first`], but only values the vehicle element carries itself. Nested
    /// elements such as `<dealer><id>` never match.
    pub fn own_first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.own.get(*key))
            .map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Image urls ordered by explicit position, then document order, without duplicates.
    pub fn images(&self) -> Vec<String> {
        let mut refs = self.images.iter().collect::<Vec<_>>();
        refs.sort_by_key(|image| (image.position.is_none(), image.position, image.order));
        let mut urls: Vec<String> = Vec::with_capacity(refs.len());
        for image in refs {
            if !urls.contains(&image.url) {
                urls.push(image.url.clone());
            }
        }
        urls
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn insert(&mut self, key: String, value: &str) {
        if let Some(value) = clean_text(value) {
            let values = self.values.entry(key).or_default();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    fn insert_own(&mut self, key: String, value: &str) {
        if let Some(cleaned) = clean_text(value) {
            self.own.entry(key.clone()).or_insert(cleaned);
        }
        self.insert(key, value);
    }

    fn visit(&mut self, node: Node, parent: Option<&str>) {
        let name = normalize_key(node.tag_name().name());

        if IMAGE_CONTAINERS.contains(&name.as_str()) {
            self.collect_images(node);
            return;
        }
        if is_image_tag(&name) {
            self.push_image(node);
            return;
        }
        if FEATURE_CONTAINERS.contains(&name.as_str()) {
            self.collect_tags(node, TagList::Features);
            return;
        }
        if CATEGORY_TAGS.contains(&name.as_str()) {
            self.collect_tags(node, TagList::Categories);
            if let Some(text) = leaf_text(node) {
                self.insert(name, &text);
            }
            return;
        }
        if KEY_VALUE_TAGS.contains(&name.as_str()) {
            if let Some(key) = first_attribute(node, KEY_ATTRIBUTES) {
                let value = node
                    .attribute("value")
                    .map(str::to_string)
                    .or_else(|| element_text(node));
                if let Some(value) = value {
                    match parent {
                        Some(_) => self.insert(normalize_key(key), &value),
                        None => self.insert_own(normalize_key(key), &value),
                    }
                }
                return;
            }
        }

        let children = node.children().filter(Node::is_element).collect::<Vec<_>>();
        for attr in node.attributes() {
            self.insert(format!("{name}.{}", normalize_key(attr.name())), attr.value());
        }
        if children.is_empty() {
            let text = element_text(node).or_else(|| node.attribute("value").map(str::to_string));
            if let Some(text) = text {
                match parent {
                    Some(parent) => {
                        self.insert(format!("{parent}.{name}"), &text);
                        self.insert(name, &text);
                    }
                    None => self.insert_own(name, &text),
                }
            }
        } else {
            for child in children {
                self.visit(child, Some(&name));
            }
        }
    }

    fn collect_images(&mut self, container: Node) {
        let children = container.children().filter(Node::is_element).collect::<Vec<_>>();
        if children.is_empty() {
            if let Some(text) = element_text(container) {
                for url in split_urls(&text) {
                    self.push_url(url, None);
                }
            }
            return;
        }
        for child in children {
            if child.children().any(|c| c.is_element()) {
                // <image><url>..</url><position>..</position></image>
                let url = child
                    .descendants()
                    .filter(|d| d.is_element())
                    .find(|d| IMAGE_URL_KEYS.contains(&normalize_key(d.tag_name().name()).as_str()))
                    .and_then(element_text);
                let position = child
                    .descendants()
                    .filter(|d| d.is_element())
                    .find(|d| {
                        IMAGE_POSITION_KEYS.contains(&normalize_key(d.tag_name().name()).as_str())
                    })
                    .and_then(element_text)
                    .and_then(|p| p.trim().parse().ok())
                    .or_else(|| image_position(child));
                if let Some(url) = url {
                    self.push_url(&url, position);
                }
            } else {
                self.push_image(child);
            }
        }
    }

    fn push_image(&mut self, node: Node) {
        let source = first_attribute(node, IMAGE_URL_KEYS)
            .map(str::to_string)
            .or_else(|| element_text(node));
        let position = image_position(node);
        if let Some(source) = source {
            for url in split_urls(&source) {
                self.push_url(url, position);
            }
        }
    }

    fn push_url(&mut self, url: &str, position: Option<i64>) {
        if looks_like_url(url) {
            self.images.push(ImageRef {
                position,
                order: self.images.len(),
                url: url.trim().to_string(),
            });
        }
    }

    fn collect_tags(&mut self, container: Node, list: TagList) {
        let leaves = container
            .descendants()
            .skip(1)
            .filter(|d| d.is_element() && !d.children().any(|c| c.is_element()))
            .collect::<Vec<_>>();

        if leaves.is_empty() {
            if let Some(text) = element_text(container) {
                for item in split_list(&text) {
                    self.push_tag(list, item);
                }
            }
            return;
        }

        for leaf in leaves {
            let tag = leaf.tag_name().name();
            let text = element_text(leaf).or_else(|| {
                first_attribute(leaf, &["value", "name", "label"]).map(str::to_string)
            });
            let Some(text) = text else { continue };
            match parse_bool(&text) {
                Some(true) if !GENERIC_ITEM_TAGS.contains(&normalize_key(tag).as_str()) => {
                    self.push_tag(list, &humanize(tag))
                }
                Some(_) => {}
                None => {
                    for item in split_list(&text) {
                        self.push_tag(list, item);
                    }
                }
            }
        }
    }

    fn push_tag(&mut self, list: TagList, item: &str) {
        let target = match list {
            TagList::Features => &mut self.features,
            TagList::Categories => &mut self.categories,
        };
        let item = item.trim();
        if !item.is_empty() && !target.iter().any(|t| t.eq_ignore_ascii_case(item)) {
            target.push(item.to_string());
        }
    }
}

fn is_image_tag(name: &str) -> bool {
    if IMAGE_TAGS.contains(&name) {
        return true;
    }
    IMAGE_TAGS.iter().any(|tag| {
        name.strip_prefix(tag)
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
    })
}

fn image_position(node: Node) -> Option<i64> {
    first_attribute(node, IMAGE_POSITION_KEYS).and_then(|p| p.trim().parse().ok())
}

/// Value of the first of `names` present on `node`, in the priority order of `names`.
fn first_attribute<'a>(node: Node<'a, '_>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        node.attributes()
            .find(|attr| normalize_key(attr.name()) == *name)
            .map(|attr| attr.value())
    })
}

/// Concatenated, trimmed text of all descendants (CDATA included).
fn element_text(node: Node) -> Option<String> {
    let text = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>();
    clean_text(&text)
}

fn leaf_text(node: Node) -> Option<String> {
    if node.children().any(|c| c.is_element()) {
        None
    } else {
        element_text(node)
    }
}

/// `klima_automatik` → `Klima automatik`
fn humanize(tag: &str) -> String {
    let spaced = tag.replace(['_', '-'], " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::FieldMap;

    fn with_fields<R>(xml: &str, f: impl FnOnce(&FieldMap) -> R) -> R {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let map = FieldMap::from_element(doc.root_element());
        f(&map)
    }

    #[test]
    fn test_attributes_elements_and_paths() {
        with_fields(
            r#"<vehicle id="A-1" make="Audi">
                <model>A4</model>
                <engine><power unit="kw">110</power></engine>
                <price currency="EUR" value="19990"/>
            </vehicle>"#,
            |map| {
                assert_eq!(map.first(&["id"]), Some("A-1"));
                assert_eq!(map.first(&["make"]), Some("Audi"));
                assert_eq!(map.first(&["model"]), Some("A4"));
                assert_eq!(map.first(&["engine.power"]), Some("110"));
                assert_eq!(map.first(&["power"]), Some("110"));
                assert_eq!(map.first(&["power.unit"]), Some("kw"));
                assert_eq!(map.first(&["price.currency"]), Some("EUR"));
                assert_eq!(map.first(&["price"]), Some("19990"));
            },
        );
    }

    #[test]
    fn test_key_value_elements() {
        with_fields(
            r#"<fahrzeug>
                <feld name="Marke">VW</feld>
                <feld name="Kilometerstand" value="45.000"/>
                <property key="Türen">5</property>
            </fahrzeug>"#,
            |map| {
                assert_eq!(map.first(&["marke"]), Some("VW"));
                assert_eq!(map.first(&["kilometerstand"]), Some("45.000"));
                assert_eq!(map.first(&["tueren"]), Some("5"));
            },
        );
    }

    #[test]
    fn test_fallback_chain_skips_unparseable() {
        with_fields(
            r#"<vehicle><price>auf Anfrage</price><preis>12.500</preis></vehicle>"#,
            |map| {
                assert_eq!(map.find(&["price", "preis"], crate::values::parse_int), Some(12500));
                assert_eq!(map.first(&["missing", "price"]), Some("auf Anfrage"));
            },
        );
    }

    #[test]
    fn test_images_in_all_shapes() {
        with_fields(
            r#"<vehicle>
                <images>
                    <image position="2">https://cdn/b.jpg</image>
                    <image url="https://cdn/a.jpg" position="1"/>
                    <image><url>https://cdn/c.jpg</url><position>3</position></image>
                    <image>https://cdn/a.jpg</image>
                </images>
                <bild_1>https://cdn/d.jpg</bild_1>
                <image_count>4</image_count>
            </vehicle>"#,
            |map| {
                assert_eq!(
                    map.images(),
                    vec![
                        "https://cdn/a.jpg".to_string(),
                        "https://cdn/b.jpg".to_string(),
                        "https://cdn/c.jpg".to_string(),
                        "https://cdn/d.jpg".to_string(),
                    ]
                );
                assert_eq!(map.first(&["image_count"]), Some("4"));
            },
        );
    }

    #[test]
    fn test_image_list_in_text() {
        with_fields(
            r#"<vehicle><bilder>https://cdn/1.jpg,https://cdn/2.jpg</bilder></vehicle>"#,
            |map| {
                assert_eq!(
                    map.images(),
                    vec!["https://cdn/1.jpg".to_string(), "https://cdn/2.jpg".to_string()]
                );
            },
        );
    }

    #[test]
    fn test_features_and_categories() {
        with_fields(
            r#"<vehicle>
                <ausstattung>
                    <merkmal>ABS</merkmal>
                    <klima_automatik>ja</klima_automatik>
                    <standheizung>nein</standheizung>
                    <merkmal>Navi; Sitzheizung</merkmal>
                    <merkmal>abs</merkmal>
                </ausstattung>
                <category>Limousine</category>
                <tags><tag>Top-Angebot</tag></tags>
            </vehicle>"#,
            |map| {
                assert_eq!(
                    map.features(),
                    &["ABS", "Klima automatik", "Navi", "Sitzheizung"]
                );
                assert_eq!(map.categories(), &["Limousine", "Top-Angebot"]);
                assert_eq!(map.first(&["category"]), Some("Limousine"));
            },
        );
    }
}
