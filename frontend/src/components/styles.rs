use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::components::banner::BannerKind;
use crate::config::BannerSettings;

pub const STYLE_ELEMENT_ID: &str = "form-message-styles";

/// CSS for the banner and its enter/exit animations.
pub fn stylesheet(settings: &BannerSettings) -> String {
    let exit_ms = settings.exit_ms;
    let success = BannerKind::Success.color();
    let error = BannerKind::Error.color();

    format!(
        r#"
    @keyframes slideDown {{
        from {{
            opacity: 0;
            transform: translateX(-50%) translateY(-20px);
        }}
        to {{
            opacity: 1;
            transform: translateX(-50%) translateY(0);
        }}
    }}

    @keyframes slideUp {{
        from {{
            opacity: 1;
            transform: translateX(-50%) translateY(0);
        }}
        to {{
            opacity: 0;
            transform: translateX(-50%) translateY(-20px);
        }}
    }}

    .form-message {{
        position: fixed;
        top: 20px;
        left: 50%;
        transform: translateX(-50%);
        z-index: 10000;
        min-width: 300px;
        max-width: 600px;
        padding: 15px 20px;
        border-radius: 8px;
        box-shadow: 0 4px 12px rgba(0,0,0,0.15);
        animation: slideDown {exit_ms}ms ease-out;
        color: white;
    }}

    .form-message-success {{
        background-color: {success};
    }}

    .form-message-error {{
        background-color: {error};
    }}

    .message-content {{
        display: flex;
        align-items: center;
        gap: 12px;
    }}

    .message-icon {{
        font-size: 20px;
        font-weight: bold;
    }}

    .message-text {{
        flex: 1;
        font-size: 14px;
        line-height: 1.4;
    }}

    .message-close {{
        background: none;
        border: none;
        color: white;
        font-size: 24px;
        cursor: pointer;
        padding: 0;
        width: 24px;
        height: 24px;
        display: flex;
        align-items: center;
        justify-content: center;
        opacity: 0.8;
        transition: opacity 0.2s;
    }}

    .message-close:hover {{
        opacity: 1;
    }}
"#
    )
}

/// Exit animation applied inline once the display window is over.
pub fn exit_animation(settings: &BannerSettings) -> String {
    format!("slideUp {}ms ease-out forwards", settings.exit_ms)
}

/// Injects the banner stylesheet unless a previous call already did.
/// Returns whether anything was added.
pub fn ensure_styles(document: &Document, settings: &BannerSettings) -> Result<bool, JsValue> {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return Ok(false);
    }

    let style = document.create_element("style")?;
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(&stylesheet(settings)));

    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?
            .append_child(&style)?,
    };
    Ok(true)
}
