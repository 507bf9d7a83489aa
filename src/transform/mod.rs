/// Transform module
/// Rewrites parsed trees before they are type checked
///
/// Submodules:
/// - transform: The `Transformation` trait and the bottom-up driver
/// - constant_folding: Evaluates operators whose operands are all literals
pub mod constant_folding;
pub mod transform;
