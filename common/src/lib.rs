#[cfg(feature = "config")]
pub mod config;
#[cfg(feature = "logging")]
pub mod logging;
#[cfg(feature = "persistence")]
pub mod persistence;

/// Calls `func` until it succeeds or `tries` attempts have failed, sleeping `timeout` between
/// attempts. Returns the last error.
#[cfg(feature = "tokio")]
pub async fn retry_async<F, Fut, O, E>(
    timeout: std::time::Duration,
    tries: usize,
    func: F,
) -> Result<O, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    let mut attempt = 0;
    loop {
        match func().await {
            Ok(o) => return Ok(o),
            Err(e) => {
                attempt += 1;
                if attempt >= tries {
                    return Err(e);
                }
                tokio::time::sleep(timeout).await;
            }
        };
    }
}
