mod consts;
pub mod f2xm1;
mod float128;
pub mod float80;
pub mod fpatan;
pub mod fprem;
pub mod fsincos;
pub mod fyl2x;
mod poly;
pub mod status;

pub use f2xm1::f2xm1;
pub use float80::Float80;
pub use fpatan::fpatan;
pub use fprem::{fprem, fprem1};
pub use fsincos::{fcos, fsin, fsincos, ftan};
pub use fyl2x::{fyl2x, fyl2xp1};
pub use status::{Completion, ExceptionFlags, FpuStatus, PrecisionControl, RoundingMode};

#[cfg(test)]
pub mod test;
