/// ToUnicode CMap attached to every rewritten font. Maps the Latin-1 range
/// through unchanged and the Windows-1251 upper half onto Cyrillic.
pub(crate) const IDENTITY_UCS_CMAP: &[u8] = include_bytes!("identity_ucs.cmap");
