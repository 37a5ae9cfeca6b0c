mod bootstrap;

pub use bootstrap::BootstrapService;
