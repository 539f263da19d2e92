pub mod admin;
pub mod cleanup;
pub mod import;
pub mod vehicle;

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = String, example = "ok"))
)]
pub async fn health() -> &'static str {
    "ok"
}
