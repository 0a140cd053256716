// Closed-loop model predictive control of a first-order lag plant.
//
// usage: predictive_control [key=value ...] [plot=<file.png>]
//   keys: duration dt cdt ref horizon lrate decay iter ku tau sat
//   e.g.  predictive_control ref=1,2,4,1 horizon=30 sat=-5,5 plot=mpc.png
//
// Unparseable values keep the preset (ref falls back to one flat setpoint);
// tau=0, horizon=0 and cdt<dt stop the program before simulating.

use std::process;
use std::thread;
use std::time::Duration;

use predictive_control::{MpcConfig, ResponsePlot, SimulationRunner};
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(300);

fn main() {
    tracing_subscriber::fmt::init();

    let mut plot_path = None;
    let mut options = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.strip_prefix("plot=") {
            Some(path) => plot_path = Some(path.to_string()),
            None => options.push(arg),
        }
    }

    let config = match MpcConfig::from_pairs(MpcConfig::interactive(), &options) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let mut runner = SimulationRunner::new();
    if let Err(e) = runner.start(config.clone()) {
        error!("{}", e);
        process::exit(1);
    }

    let report = loop {
        if let Some(result) = runner.poll() {
            break result;
        }
        thread::sleep(POLL_INTERVAL);
    };
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let history = &report.history;
    let n = history.len();
    println!("simulated {:.2} s in {} ticks, {} control updates", config.duration, n, history.control_updates);
    if n > 0 {
        let last = n - 1;
        let setpoint = report.reference.last().copied().unwrap_or(0.0);
        println!(
            "final: y = {:.4}, u = {:.4}, ref = {:.4}, |e| = {:.2e}",
            history.output[last],
            history.control[last],
            setpoint,
            (history.output[last] - setpoint).abs()
        );
    }

    if let Some(path) = plot_path {
        let mut plot = ResponsePlot::new();
        plot.draw(history, &report.reference);
        match plot.save_png(&path, 1000, 700) {
            Ok(()) => info!(path = path.as_str(), "plot saved"),
            Err(e) => error!("{}", e),
        }
    }
}
