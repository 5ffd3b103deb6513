//! Interactive previewer: browse, search and export a converted document
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use anyhow::Result;
pub use app::{App, Focus, Loader};
use terminal::TerminalSession;

use crate::output::OutputConfig;
use crate::pipeline::Conversion;
use crate::render::RenderOptions;

/// Run the previewer until the user quits
///
/// `loader` re-reads the sources for Ctrl+R; pass `None` when there is nothing to reload.
pub fn run_preview(
    conversion: Conversion,
    render_options: RenderOptions,
    output: OutputConfig,
    loader: Option<Loader>,
) -> Result<()> {
    let mut app = App::new(conversion, render_options, output);
    if let Some(loader) = loader {
        app = app.with_loader(loader);
    }

    let mut session = TerminalSession::enter()?;
    let res = app.run(session.terminal_mut());
    session.restore()?;

    res
}
