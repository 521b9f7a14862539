pub mod export;
pub mod filelist;
#[cfg(feature = "netcdf")]
pub mod netcdf;
pub mod source;
pub mod writers;
