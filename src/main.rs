fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Non-interactive smoke test mode (for automated checks).
    // Renders a single frame for a specific page and exits 0.
    // Usage: --smoke or --smoke=welcome|servers|apps|versions|profiles|complete
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--smoke" || a.starts_with("--smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        if let Err(e) = viewer_setup::run_tui_smoke(target) {
            eprintln!("viewer-setup: smoke rendering failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = viewer_setup::run_tui() {
        eprintln!("viewer-setup: {}", e);
        std::process::exit(1);
    }
}
