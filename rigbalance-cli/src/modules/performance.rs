use rigbalance::engine::{
    advisor::EstimatePerformance,
    category::CategoryId,
    component::ComponentType,
    estimate::{Resolution, Settings},
};
use structopt::StructOpt;

use crate::run_impl_struct;

#[derive(StructOpt)]
pub struct Estimate {
    name: String,
    #[structopt(long = "type", short = "t")]
    kind: ComponentType,
    #[structopt(long, short)]
    category: CategoryId,
    #[structopt(long, short, default_value = "1440p")]
    resolution: Resolution,
    /// low, medium, high or ultra
    #[structopt(long, short, default_value = "high")]
    settings: Settings,
}

run_impl_struct!(Estimate, self, advisor, {
    advisor.estimate_performance(&EstimatePerformance {
        component_name: self.name.clone(),
        component_type: self.kind,
        category: self.category,
        resolution: self.resolution,
        settings: self.settings,
    })?
});
