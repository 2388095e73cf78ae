use structopt::StructOpt;

use crate::run_impl_struct;

#[derive(StructOpt)]
pub struct Categories {}

run_impl_struct!(Categories, self, advisor, { advisor.categories() });
