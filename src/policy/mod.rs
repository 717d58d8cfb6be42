pub mod classifier;
pub mod ignore_list;
pub mod inactivity;
