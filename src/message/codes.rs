//! Enumerated values carried inside signal bodies.
use core::convert::TryFrom;

use crate::message::ParseError;

/// Declare a `u8` backed wire enum with strict decoding.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident = $value:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $( $(#[$variant_meta])* $variant = $value, )*
        }

        impl TryFrom<u8> for $name {
            type Error = ParseError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )*
                    _ => Err(ParseError::UnrecognizedDiscriminant {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }
    };
}

wire_enum! {
    /// Error codes of AVDTP and A2DP reject responses.
    #[allow(missing_docs)]
    pub enum ErrorCode {
        Success = 0x00,
        BadHeaderFormat = 0x01,
        BadLength = 0x11,
        BadAcpSeid = 0x12,
        SepInUse = 0x13,
        SepNotInUse = 0x14,
        BadServCategory = 0x17,
        BadPayloadFormat = 0x18,
        NotSupportedCommand = 0x19,
        InvalidCapabilities = 0x1A,
        BadRecoveryType = 0x22,
        BadMediaTransportFormat = 0x23,
        BadRecoveryFormat = 0x25,
        BadRohcFormat = 0x26,
        BadCpFormat = 0x27,
        BadMultiplexingFormat = 0x28,
        UnsupportedConfiguration = 0x29,
        BadState = 0x31,
        GavdtpBadService = 0x80,
        GavdtpInsufficientResources = 0x81,
        A2dpInvalidCodecType = 0xC1,
        A2dpNotSupportedCodecType = 0xC2,
        A2dpInvalidSamplingFrequency = 0xC3,
        A2dpNotSupportedSamplingFrequency = 0xC4,
        A2dpInvalidChannelMode = 0xC5,
        A2dpNotSupportedChannelMode = 0xC6,
        A2dpInvalidSubbands = 0xC7,
        A2dpNotSupportedSubbands = 0xC8,
        A2dpInvalidAllocationMethod = 0xC9,
        A2dpNotSupportedAllocationMethod = 0xCA,
        A2dpInvalidMinimumBitpoolValue = 0xCB,
        A2dpNotSupportedMinimumBitpoolValue = 0xCC,
        A2dpInvalidMaximumBitpoolValue = 0xCD,
        A2dpNotSupportedMaximumBitpoolValue = 0xCE,
        A2dpInvalidLayer = 0xCF,
        A2dpNotSupportedLayer = 0xD0,
        A2dpNotSupportedCrc = 0xD1,
        A2dpNotSupportedMpf = 0xD2,
        A2dpNotSupportedVbr = 0xD3,
        A2dpInvalidBitRate = 0xD4,
        A2dpNotSupportedBitRate = 0xD5,
        A2dpInvalidObjectType = 0xD6,
        A2dpNotSupportedObjectType = 0xD7,
        A2dpInvalidChannels = 0xD8,
        A2dpNotSupportedChannels = 0xD9,
        A2dpInvalidBlockLength = 0xDD,
        A2dpInvalidCpType = 0xE0,
        A2dpInvalidCpFormat = 0xE1,
        A2dpInvalidCodecParameter = 0xE2,
        A2dpNotSupportedCodecParameter = 0xE3,
    }
}

wire_enum! {
    /// Stream endpoint direction.
    pub enum Tsep {
        /// The endpoint produces media.
        Source = 0,
        /// The endpoint consumes media.
        Sink = 1,
    }
}

wire_enum! {
    /// Category of a service capability.
    #[allow(missing_docs)]
    pub enum ServiceCategory {
        MediaTransport = 0x01,
        Reporting = 0x02,
        Recovery = 0x03,
        ContentProtection = 0x04,
        HeaderCompression = 0x05,
        Multiplexing = 0x06,
        MediaCodec = 0x07,
        DelayReporting = 0x08,
    }
}
