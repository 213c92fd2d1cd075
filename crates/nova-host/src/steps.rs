//! Test step generation.
//!
//! One step per accepted event, in ascending timestamp order. Each step
//! carries the event's one-line summary and a Selenium (Python) fragment.
//! Events from an iframe switch into each hosting frame in turn and back
//! out after;
//! events from a popup switch to the newest window and back to the first.

use nova_protocols::{EventType, FrameContext, FrameKind, RecordedEvent, TestStep};

/// Derive test steps from the raw accumulator.
pub fn generate_steps(events: &[RecordedEvent]) -> Vec<TestStep> {
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            TestStep::new(format!("step-{}", index + 1), event.summary(), step_code(event))
        })
        .collect()
}

fn step_code(event: &RecordedEvent) -> String {
    let element = format!("driver.find_element({})", locator(event));
    let mut lines = Vec::new();

    match event.context.as_ref().map(|ctx| (ctx.kind, ctx)) {
        Some((FrameKind::Iframe, ctx)) => {
            for frame in ctx.frame_chain() {
                lines.push(format!(
                    "driver.switch_to.frame(driver.find_element(By.CSS_SELECTOR, {}))",
                    py_str(&frame)
                ));
            }
            lines.extend(action_lines(event, &element));
            lines.push("driver.switch_to.default_content()".to_string());
        }
        Some((FrameKind::Popup, _)) => {
            lines.push("driver.switch_to.window(driver.window_handles[-1])".to_string());
            lines.extend(action_lines(event, &element));
            lines.push("driver.switch_to.window(driver.window_handles[0])".to_string());
        }
        None => lines.extend(action_lines(event, &element)),
    }

    lines.join("\n")
}

fn action_lines(event: &RecordedEvent, element: &str) -> Vec<String> {
    let value = py_str(event.value.as_deref().unwrap_or_default());
    match event.event_type {
        EventType::Click => vec![format!("{}.click()", element)],
        EventType::Input => vec![
            format!("{}.clear()", element),
            format!("{}.send_keys({})", element, value),
        ],
        EventType::Change => match event.tag_name.as_str() {
            "select" => vec![format!("Select({}).select_by_value({})", element, value)],
            "input" | "textarea" => vec![
                format!("{}.clear()", element),
                format!("{}.send_keys({})", element, value),
            ],
            _ => vec![format!("{}.click()", element)],
        },
        EventType::Submit => vec![format!("{}.submit()", element)],
    }
}

/// Most specific locator available: id, then name, then CSS, then path.
fn locator(event: &RecordedEvent) -> String {
    if let Some(id) = non_empty(event.id.as_deref()) {
        return format!("By.ID, {}", py_str(id));
    }
    if let Some(name) = non_empty(event.name.as_deref()) {
        return format!("By.NAME, {}", py_str(name));
    }
    let selector = local_selector(&event.selector, event.context.as_ref());
    if !selector.is_empty() {
        return format!("By.CSS_SELECTOR, {}", py_str(selector));
    }
    format!("By.XPATH, {}", py_str(&event.xpath))
}

/// The selector relative to the frame the step switches into.
fn local_selector<'a>(selector: &'a str, context: Option<&FrameContext>) -> &'a str {
    match context {
        Some(ctx) if ctx.kind == FrameKind::Iframe && !ctx.selector.is_empty() => selector
            .strip_prefix(ctx.selector.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
            .unwrap_or(selector),
        _ => selector,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Python string literal. JSON string escaping is valid Python.
fn py_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
