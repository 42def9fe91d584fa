// Domain layer: graph and upstream release models, plus the ports the scraper depends on.

pub mod model;
pub mod ports;
