use color_eyre::Result;

use state::StateNN;
use ui::{ App, AppState, Plot };

pub mod ui;
pub mod state;

/// Takes over the terminal, draws `plot` until the user closes it and
/// restores the terminal before returning.
pub fn show(state_nn: &StateNN, plot: Plot) -> Result<()> {
    let terminal = ratatui::init();
    let app = App {
        state: AppState::default(),
        state_nn: state_nn.clone(),
        plot,
    };

    let app_result = app.run(terminal);
    ratatui::restore();
    app_result
}
