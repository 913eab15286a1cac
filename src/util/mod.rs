#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;

pub(crate) fn now_ms() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().round() as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }
}

/// Render a millisecond timestamp the way the browser would for the user's locale.
pub(crate) fn format_timestamp(ms: i64) -> String {
    #[cfg(target_arch = "wasm32")]
    {
        let d = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(ms as f64));
        d.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED)
            .into()
    }

    // Native builds (tests) have no locale database; use a stable UTC rendering.
    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::DateTime::from_timestamp_millis(ms)
            .map(|d| d.format("%Y/%m/%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// Hex-encoded random token, used for OAuth `state`/`nonce` values.
pub(crate) fn random_token() -> String {
    let mut buf = [0u8; 16];
    if getrandom::getrandom(&mut buf).is_err() {
        // Still unique enough to correlate a single popup round trip.
        return format!("{:x}", now_ms());
    }
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

/// Resolve after `ms` milliseconds on the browser event loop.
#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(win) = web_sys::window() {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                resolve.unchecked_ref(),
                ms,
            );
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}
