//! Run termination
//!
//! After the appointment horizon the drain detector polls the clinic. It
//! stops the run once no patient is in the system and every doctor and
//! imaging room is idle, or forces a stop once the hard timeout has passed.

use tracing::debug;

use super::context::SimContext;
use super::error::SimulationResult;
use super::process::{Process, Yield};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainStage {
    Idle,
    AwaitingHorizon,
    Polling,
}

/// Watches for a drained clinic after the horizon
#[derive(Debug)]
pub struct DrainDetector {
    interval: f64,
    stage: DrainStage,
}

impl DrainDetector {
    /// Detector polling every `interval` minutes after the horizon
    pub fn new(interval: f64) -> Self {
        Self { interval, stage: DrainStage::Idle }
    }

    fn warn_busy(&self, ctx: &mut SimContext) {
        // Throttled to roughly one warning per five polls
        if ctx.now().trunc() % (self.interval * 5.0) >= self.interval {
            return;
        }
        let resources = ctx.resources();
        let message = format!(
            "WARNING: {:.2} - PatientCounter={} but queues/resources not empty. Re-checking. DocQ: {:?}, ImagingQ: {:?}, DocUsers: {:?}, ImagingUsers: {:?}",
            ctx.now(),
            ctx.counters().in_system,
            resources.doctor_queue_lengths(),
            resources.imaging_queue_lengths(),
            resources.doctor_holder_counts(),
            resources.imaging_holder_counts(),
        );
        ctx.narrate_warning(message);
    }

    fn poll(&mut self, ctx: &mut SimContext) -> Yield {
        let now = ctx.now();
        let in_system = ctx.counters().in_system;
        debug!(sim_time = now, in_system, "Drain check");

        if in_system == 0 {
            if ctx.resources().all_idle() {
                ctx.narrate(format!(
                    "--- {:.2} - SYSTEM EMPTY (PatientCounter={}, all queues/resources empty). Stopping simulation. ---",
                    now, in_system
                ));
                ctx.request_stop("clinic drained");
                return Yield::Done;
            }
            self.warn_busy(ctx);
        }

        if now > ctx.config().hard_timeout_at() {
            ctx.narrate_warning(format!(
                "--- {:.2} - LONG RUN WARNING. PatientCounter={}. Forcing stop. ---",
                now, in_system
            ));
            ctx.force_stop("hard timeout exceeded");
            return Yield::Done;
        }

        Yield::Wait(self.interval)
    }
}

impl Process for DrainDetector {
    fn name(&self) -> String {
        "drain-detector".to_string()
    }

    fn resume(&mut self, ctx: &mut SimContext) -> SimulationResult<Yield> {
        match self.stage {
            DrainStage::Idle => {
                self.stage = DrainStage::AwaitingHorizon;
                Ok(Yield::Wait((ctx.config().horizon - ctx.now()).max(0.0)))
            }
            DrainStage::AwaitingHorizon => {
                ctx.narrate(format!(
                    "--- {:.2} - APPOINTMENT CUTOFF ({:.0} min) reached. Walk-ins stopped at {:.0} min. Existing patients are finishing. ---",
                    ctx.now(),
                    ctx.config().horizon,
                    ctx.config().walkin_cutoff()
                ));
                self.stage = DrainStage::Polling;
                Ok(self.poll(ctx))
            }
            DrainStage::Polling => Ok(self.poll(ctx)),
        }
    }
}
