pub mod nexo;
