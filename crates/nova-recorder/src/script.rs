//! JavaScript rendition of the recorder for real browsing surfaces.
//!
//! The script is embedded from `recorder.js` and parameterised with the
//! host binding name, the highlight class and the document's provenance.
//! Evaluating it returns `true` when it installed, and `false` when the
//! document already carried a recorder or installation was deferred until
//! the document has a root element.

use nova_protocols::FrameContext;

const TEMPLATE: &str = include_str!("recorder.js");

/// Render the recorder script.
///
/// `context` is `None` for the top-level document and `Some` for popup
/// windows the host instruments itself.
pub fn recorder_script(binding: &str, highlight_class: &str, context: Option<&FrameContext>) -> String {
    TEMPLATE
        .replace("__NOVA_BINDING__", &js_string(binding))
        .replace("__NOVA_HIGHLIGHT__", &js_string(highlight_class))
        .replace("__NOVA_CONTEXT__", &js_value(context))
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn js_value(context: Option<&FrameContext>) -> String {
    serde_json::to_string(&context).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_replaced() {
        let script = recorder_script("__novaRecorderEmit", "recording-highlight", None);
        assert!(!script.contains("__NOVA_"));
        assert!(script.contains("const BINDING = \"__novaRecorderEmit\";"));
        assert!(script.contains("const HIGHLIGHT = \"recording-highlight\";"));
        assert!(script.contains("const CONTEXT = null;"));
    }

    #[test]
    fn test_popup_context_is_embedded_as_json() {
        let ctx = FrameContext::popup("https://app.test/popup?a=\"b\"");
        let script = recorder_script("emit", "hl", Some(&ctx));
        assert!(script.contains(r#"const CONTEXT = {"type":"popup","src":"https://app.test/popup?a=\"b\"","selector":""};"#));
    }

    #[test]
    fn test_script_emits_channel_marker() {
        let script = recorder_script("emit", "hl", None);
        assert!(script.contains("type: 'RECORDED_EVENT'"));
        for event in ["'click'", "'input'", "'change'", "'submit'"] {
            assert!(script.contains(event));
        }
    }
}
