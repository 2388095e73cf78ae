use rigbalance::{
    engine::{advisor::RecommendPairing, category::CategoryId, component::ComponentType},
    filters::ScanFilter,
};
use structopt::StructOpt;

use crate::run_impl_struct;

#[derive(StructOpt)]
pub struct Recommend {
    /// Name of the component you already have
    name: String,
    /// Its type: cpu or gpu
    #[structopt(long = "type", short = "t")]
    kind: ComponentType,
    /// Rank for one category only (esport, aaa_gpu, balanced, simulation)
    #[structopt(long, short)]
    category: Option<CategoryId>,
    #[structopt(long, short)]
    limit: Option<usize>,
    #[structopt(long)]
    include_workstation: bool,
    #[structopt(long)]
    include_mobile: bool,
    #[structopt(long)]
    include_server: bool,
    /// Skip candidates below this normalized score
    #[structopt(long)]
    min_score: Option<u8>,
    /// Skip candidates with a higher known TDP
    #[structopt(long)]
    max_tdp: Option<u32>,
}

impl Recommend {
    fn filter(&self) -> ScanFilter {
        ScanFilter {
            include_workstation: self.include_workstation,
            include_mobile: self.include_mobile,
            include_server: self.include_server,
            min_normalized_score: self.min_score,
            max_tdp_watts: self.max_tdp,
        }
    }
}

run_impl_struct!(Recommend, self, advisor, {
    let request = RecommendPairing {
        known_name: self.name.clone(),
        known_type: self.kind,
        category: self.category,
        limit: self.limit,
    };
    advisor.recommend_pairing(&request, &self.filter())?
});
