use anyhow::Result;

/// Everything in payclock runs on one thread. There is exactly one actor owning the session.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
