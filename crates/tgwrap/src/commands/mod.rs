pub mod deprecated;
pub mod run_all;
pub mod terraform;
pub mod terragrunt_info;
