use rigbalance::engine::{
    advisor::{AnalyzePairing, GamingProfileRequest},
    estimate::Resolution,
};
use structopt::StructOpt;

use crate::run_impl_struct;

#[derive(StructOpt)]
pub struct Analyze {
    /// CPU name as listed in the catalog
    cpu: String,
    /// GPU name as listed in the catalog
    gpu: String,
}

impl Analyze {
    fn request(&self) -> AnalyzePairing {
        AnalyzePairing {
            cpu_name: self.cpu.clone(),
            gpu_name: self.gpu.clone(),
        }
    }
}

run_impl_struct!(Analyze, self, advisor, {
    advisor.analyze_pairing(&self.request())?
});

#[derive(StructOpt)]
pub struct Profile {
    cpu: String,
    gpu: String,
    /// 1080p, 1440p or 4K; the configured default when omitted
    #[structopt(long, short)]
    resolution: Option<Resolution>,
}

run_impl_struct!(Profile, self, advisor, {
    advisor.gaming_profile(&GamingProfileRequest {
        cpu_name: self.cpu.clone(),
        gpu_name: self.gpu.clone(),
        resolution: self.resolution,
    })?
});

#[derive(StructOpt)]
pub struct Power {
    cpu: String,
    gpu: String,
}

run_impl_struct!(Power, self, advisor, {
    advisor.power_analysis(&AnalyzePairing {
        cpu_name: self.cpu.clone(),
        gpu_name: self.gpu.clone(),
    })?
});
