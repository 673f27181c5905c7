use super::{Adapter, ErrorPolicy};
use crate::model::SystemMetrics;
use anyhow::Result;
use sysinfo::{Disks, System};

/// Metrics of the machine the dashboard runs on.
#[derive(Default)]
pub struct SystemAdapter;

impl Adapter for SystemAdapter {
    type Params = ();
    type Output = SystemMetrics;

    fn name(&self) -> &'static str {
        "system"
    }

    fn error_policy(&self) -> ErrorPolicy {
        ErrorPolicy::Propagate
    }

    fn fetch(&self, _params: &()) -> Result<SystemMetrics> {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        // CPU usage is a delta between two samples.
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let (disk_total, disk_free) = disks.list().iter().fold((0u64, 0u64), |(t, f), d| {
            (t + d.total_space(), f + d.available_space())
        });

        Ok(SystemMetrics {
            host_name: System::host_name(),
            os: System::long_os_version(),
            cpu_count: sys.cpus().len(),
            cpu_percent: sys.global_cpu_usage(),
            mem_used: sys.used_memory(),
            mem_total: sys.total_memory(),
            disk_used: disk_total.saturating_sub(disk_free),
            disk_total,
            uptime_secs: System::uptime(),
        })
    }
}
