use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("malformed xml: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("unknown feed action: `{0}`")]
    UnknownAction(String),
    #[error("vehicle without inventory number")]
    MissingInventoryNumber,
    #[error("vehicle `{inventory_number}` is missing required field `{field}`")]
    MissingField {
        inventory_number: String,
        field: &'static str,
    },
}
