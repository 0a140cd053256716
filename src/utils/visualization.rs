//! Visualization utilities for predictive_control
//!
//! Renders a closed-loop run with gnuplot: output against reference on top,
//! control action below.

use gnuplot::{AxesCommon, Caption, Color, Figure, LineWidth};

use crate::common::{ControlError, ControlResult};
use crate::control::SimulationHistory;

/// Color palette for consistent styling
pub mod colors {
    pub const OUTPUT: &str = "#FF0000";
    pub const REFERENCE: &str = "#000000";
    pub const CONTROL: &str = "#0000FF";
}

/// Two-panel response plot of one run
pub struct ResponsePlot {
    figure: Figure,
    title: String,
    line_width: f64,
    series: usize,
}

impl ResponsePlot {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: "Model Predictive Control".to_string(),
            line_width: 2.0,
            series: 0,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        self.line_width = width;
        self
    }

    /// Number of curves drawn so far
    pub fn series(&self) -> usize {
        self.series
    }

    /// Draw output, reference and control. The last sample of the history
    /// is left out, and the reference is paired with whichever time axis
    /// matches its length.
    pub fn draw(&mut self, history: &SimulationHistory, reference: &[f64]) -> &mut Self {
        let (time, output, control) = history.trimmed();
        let (ref_time, ref_values) = history.reference_for_plot(reference);

        self.figure
            .axes2d()
            .set_pos_grid(2, 1, 0)
            .set_title(&self.title, &[])
            .set_y_label("y(t)", &[])
            .set_x_grid(true)
            .set_y_grid(true)
            .lines(time, output, &[Caption("y(t)"), Color(colors::OUTPUT), LineWidth(self.line_width)])
            .lines(ref_time, ref_values, &[Caption("Ref(t)"), Color(colors::REFERENCE), LineWidth(self.line_width)]);

        self.figure
            .axes2d()
            .set_pos_grid(2, 1, 1)
            .set_x_label("Time (Seconds)", &[])
            .set_y_label("u(t)", &[])
            .set_x_grid(true)
            .set_y_grid(true)
            .lines(time, control, &[Caption("u(t)"), Color(colors::CONTROL), LineWidth(self.line_width)]);

        self.series += 3;
        self
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> ControlResult<()> {
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| ControlError::Visualization(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> ControlResult<()> {
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| ControlError::Visualization(e.to_string()))
    }
}

impl Default for ResponsePlot {
    fn default() -> Self {
        Self::new()
    }
}
