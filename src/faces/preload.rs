//! Fire-and-forget image preloading.
//!
//! On WASM targets, each URL is assigned to a detached `HtmlImageElement`,
//! which makes the browser fetch it through its normal image pipeline and
//! warms every cache layer that honors ordinary image requests. The load
//! is never awaited and its outcome is not observed.
//!
//! Outside a browser window (native builds, workers) this is a no-op.

/// Ask the runtime to start fetching `url`.
///
/// Returns whether a fetch was handed to the runtime.
#[cfg(target_arch = "wasm32")]
pub fn preload_image(url: &str) -> bool {
    if web_sys::window().is_none() {
        return false;
    }

    match web_sys::HtmlImageElement::new() {
        Ok(image) => {
            image.set_src(url);
            true
        }
        Err(e) => {
            log::debug!("Image preload unavailable: {:?}", e);
            false
        }
    }
}

/// No-op stub for native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn preload_image(_url: &str) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_arch = "wasm32"))]
    fn test_native_preload_is_noop() {
        assert!(!preload_image("https://img.example.com/faces/c1/a1/f1.jpg?v=1"));
    }
}
