/// Wait `ms` milliseconds before the next step. Off the browser this returns
/// immediately.
pub async fn pause(ms: u32) {
    #[cfg(target_family = "wasm")]
    gloo_timers::future::TimeoutFuture::new(ms).await;

    #[cfg(not(target_family = "wasm"))]
    let _ = ms;
}
