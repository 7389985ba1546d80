//! Byte-level machinery shared by the binary and packed-text codecs: RLE
//! decoders, PES demux, BCD timecodes, EBU-STL record layout and the
//! CEA-608 character table.

pub mod bcd;
pub mod cea608;
pub mod ebu_stl;
pub mod pes;
pub mod rle;
