mod power_status;

pub use power_status::PowerStatusRepository;
