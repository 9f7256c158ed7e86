pub use strata_codec::*;
pub use {
    strata_codec as codec, strata_dtype as dtype, strata_error as error, strata_value as value,
};
