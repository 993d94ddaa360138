pub mod alphabet;
pub mod alphabet_serializer;
pub mod archive;
pub mod bitpack;
pub mod fastq;
pub mod profile;
pub mod progress;
pub mod read_codec;
pub mod sequence;

#[doc(hidden)]
pub mod _internal_test_data;
