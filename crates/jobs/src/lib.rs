pub mod maintenance_tick;

pub use maintenance_tick::MaintenanceTickJob;
