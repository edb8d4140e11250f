use log::debug;
use oxmin_core::{APP_ENTRY_PATH, MODULES_LOADER_PATH};
use std::time::Instant;

/// Runs `f` inside a named timing span. Spans are only reported through the
/// debug log, so this never changes what `f` does.
pub fn time<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    debug!("[profile] {} took {}ms", label, start.elapsed().as_millis());
    out
}

/// Span label for minifying `path`; the app entry and the module loader get
/// their own labels so they stand out in timing reports.
pub fn minify_label(path: &str) -> &'static str {
    match path {
        APP_ENTRY_PATH => "minify app/app.js",
        MODULES_LOADER_PATH => "minify packages/modules.js",
        _ => "minify file",
    }
}
