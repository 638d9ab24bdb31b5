//! One-shot profanity-count fetch.
//!
//! The room service exposes the cumulative count of flagged messages over
//! plain HTTP. The fetch runs once at session start, independently of the
//! socket lifecycle, and degrades to `None` on any failure: the counter
//! then keeps its default until a TALK frame carries a fresher value.

/// Fetch the current cumulative profanity count.
///
/// Returns `None` on connection failure, a non-2xx status, or a body that
/// does not hold an integer. Failures are logged at debug level and never
/// surface to the user.
pub async fn fetch_profanity_count(endpoint: &str) -> Option<u64> {
    let response = match reqwest::get(endpoint).await {
        Ok(response) => response,
        Err(error) => {
            tracing::debug!(%error, "profanity count fetch failed");
            return None;
        },
    };

    if !response.status().is_success() {
        tracing::debug!(status = %response.status(), "profanity count fetch rejected");
        return None;
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(error) => {
            tracing::debug!(%error, "profanity count body unreadable");
            return None;
        },
    };

    // The body is a bare JSON integer; tolerate surrounding whitespace.
    match body.trim().parse::<u64>() {
        Ok(count) => Some(count),
        Err(_) => {
            tracing::debug!(body = %body, "profanity count body is not an integer");
            None
        },
    }
}
