//! Simulation statistics collection and reporting.

use std::time::Instant;

/// Counters accumulated by the driver while ticking the machine.
///
/// The datapath never consults these; they are derived from observed
/// wire state at the end of each cycle.
pub struct SimStats {
    start_time: Instant,
    pub cycles: u64,
    pub instructions_retired: u64,
    pub loads: u64,
    pub stores: u64,
    pub branches_taken: u64,
    pub branches_not_taken: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            loads: 0,
            stores: 0,
            branches_taken: 0,
            branches_not_taken: 0,
        }
    }
}

impl SimStats {
    /// Prints a formatted summary of the run.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let instr = self.instructions_retired.max(1);

        println!("==================================================");
        println!("SIMULATION STATISTICS");
        println!("==================================================");
        println!("host_seconds        {seconds:.4} s");
        println!("sim_cycles          {}", self.cycles);
        println!("sim_insts           {}", self.instructions_retired);
        println!(
            "sim_cpi             {:.4}",
            self.cycles as f64 / instr as f64
        );
        println!("op.load             {}", self.loads);
        println!("op.store            {}", self.stores);
        println!("branch.taken        {}", self.branches_taken);
        println!("branch.not_taken    {}", self.branches_not_taken);
        println!("==================================================");
    }
}
