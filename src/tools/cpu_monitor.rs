use std::thread;
use std::time::Duration;
use sysinfo::System;

pub struct CpuMonitor {
    system: System,
}

impl CpuMonitor {
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        thread::sleep(Duration::from_millis(200));
        system.refresh_cpu_all();
        Self { system }
    }

    pub fn current_usage(&mut self) -> f32 {
        self.system.refresh_cpu_all();
        self.system.global_cpu_usage()
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// 預設 worker 數量：邏輯核心數的一半，至少 1
#[must_use]
pub fn default_concurrency() -> usize {
    let mut system = System::new();
    system.refresh_cpu_all();
    (system.cpus().len() / 2).max(1)
}
