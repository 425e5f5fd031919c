//! Simulates one night of queue-driven observing.
//!
//! Run with: `cargo run --example night_simulation`

use skyqueue::config::SchedulerConfig;
use skyqueue::history::{MemoryHistory, ObservationLog};
use skyqueue::resource::{ResourceState, ResourceStateMachine, Target};
use skyqueue::runner::NightRunner;
use skyqueue::scheduler::{NightPlan, NightlyOptimizer};
use skyqueue::units::advance;
use skyqueue::{Mjd, Seconds};

const RUN: &str = r#"
[scheduler]
run_name = "demo_night"
start_mjd = 60000.05
stop_mjd = 60000.45

[[queues]]
name = "default"
requests = [
    { request_id = 1, program_id = 1, ra_deg = 10.0, dec_deg = 20.0 },
    { request_id = 2, program_id = 1, ra_deg = 12.0, dec_deg = 22.0, n_repeats = 3 },
    { request_id = 3, program_id = 2, ra_deg = 40.0, dec_deg = -5.0 },
]

[[queues]]
name = "survey_slot"
window = [60000.10, 60000.20]
requests = [
    { request_id = 10, program_id = 2, ra_deg = 150.0, dec_deg = 2.0, exposure_time_s = 60.0 },
    { request_id = 11, program_id = 2, ra_deg = 152.0, dec_deg = 2.5, exposure_time_s = 60.0 },
]

[[queues]]
name = "too_grb"
override = true
window = [60000.15, 60000.18]
requests = [{ request_id = 99, program_id = 3, ra_deg = 201.3, dec_deg = -43.0 }]
"#;

/// Telescope with a fixed overhead per action; every seventh slew fails.
#[derive(Debug)]
struct SimulatedTelescope {
    now: Mjd,
    pointing: Option<Target>,
    slews: u32,
}

impl ResourceStateMachine for SimulatedTelescope {
    fn current_time(&self) -> Mjd {
        self.now
    }

    fn check_if_ready(&mut self) -> bool {
        true
    }

    fn start_slew(&mut self, target: Target) -> bool {
        self.slews += 1;
        if self.slews % 7 == 0 {
            return false;
        }
        self.pointing = Some(target);
        self.now = advance(self.now, Seconds::new(20.0));
        true
    }

    fn start_exposing(&mut self) -> bool {
        self.now = advance(self.now, Seconds::new(45.0));
        true
    }

    fn set_cant_observe(&mut self) {}

    fn wait(&mut self) {
        self.now = advance(self.now, Seconds::new(300.0));
    }

    fn current_state(&self) -> ResourceState {
        let state = ResourceState::at(self.now);
        match self.pointing {
            Some(target) => state.with_pointing(target),
            None => state,
        }
    }
}

/// Prints the constraints it would plan around.
struct PrintingOptimizer;

impl NightlyOptimizer for PrintingOptimizer {
    type Error = std::convert::Infallible;

    fn assign_night(&mut self, plan: &NightPlan) -> Result<(), Self::Error> {
        println!(
            "Optimizer sees {} free block(s) out of {}",
            plan.available_blocks().count(),
            plan.night.end - plan.night.start
        );
        for (program, count) in &plan.committed {
            println!("  program {program}: {count} equivalent observation(s) committed");
        }
        Ok(())
    }
}

fn main() {
    println!("=== Night Simulation ===\n");

    let config: SchedulerConfig = RUN.parse().unwrap();
    let registry = config.build_registry().unwrap();
    println!("Queues in scan order: {}", registry.names().join(", "));

    let telescope = SimulatedTelescope {
        now: Mjd::new(60000.0),
        pointing: None,
        slews: 0,
    };
    let mut runner = NightRunner::new(
        registry,
        telescope,
        MemoryHistory::new(config.scheduler.run_name.clone()),
        config.runner_config().unwrap(),
    );

    println!("\n--- Night Plan ---");
    let plan = runner
        .begin_night(&config.capacity_model().unwrap(), &mut PrintingOptimizer)
        .unwrap();
    println!("Timed queues tonight: {}", plan.timed_queues.join(", "));
    println!("Excluded blocks: {:?}", plan.excluded_blocks);

    println!("\n--- Running ---");
    let summary = runner.run().unwrap();

    println!("\n--- Observations ---");
    for record in runner.history().records() {
        println!(
            "#{:<3} MJD {:.5} request {:>3} program {} prev {:?}",
            record.sequence, record.obs_mjd, record.request_id, record.program_id, record.prev_request_id
        );
    }

    println!("\n--- Summary ---");
    println!("Run: {}", runner.history().run_id());
    println!("Observed: {}", summary.observations);
    println!("Failed slews: {}", summary.failed_slews);
    println!("Queue switches: {}", summary.queue_switches);
    println!("Idle steps: {}", summary.idle_steps + summary.no_work_steps);
    println!("Queues left: {}", runner.registry().names().join(", "));
}
