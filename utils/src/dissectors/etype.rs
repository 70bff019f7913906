use num_traits::FromPrimitive;

use super::{Next, Protocol};

/// Values up to this one in the Ethernet type field are IEEE 802.3 payload lengths
pub const MAX_802_3_LENGTH: u16 = 1500;

#[repr(u16)]
#[derive(Clone, Copy, Debug, EnumIter, Eq, PartialEq, Primitive)]
#[allow(non_camel_case_types)]
pub enum EtherType {
    IPV4 = 0x0800,
    ARP = 0x0806,
    VLAN = 0x8100,
    IPV6 = 0x86DD,
    HOMEPLUG = 0x887B,
    PROFINET = 0x8892,
    QINQ = 0x88A8,
    LLTD = 0x88D9,
    HOMEPLUG_AV = 0x88E1,
    IEEE_1905 = 0x893A,
}

impl From<EtherType> for Protocol {
    fn from(etype: EtherType) -> Self {
        match etype {
            EtherType::IPV4 => Protocol::IPV4,
            EtherType::ARP => Protocol::ARP,
            EtherType::VLAN | EtherType::QINQ => Protocol::VLAN,
            EtherType::IPV6 => Protocol::IPV6,
            EtherType::HOMEPLUG => Protocol::HOMEPLUG,
            EtherType::PROFINET => Protocol::PROFINET,
            EtherType::LLTD => Protocol::LLTD,
            EtherType::HOMEPLUG_AV => Protocol::HOMEPLUG_AV,
            EtherType::IEEE_1905 => Protocol::IEEE_1905,
        }
    }
}

/// Protocol selected by an Ethernet or VLAN type field
pub fn next_protocol(etype: u16) -> Next {
    if etype <= MAX_802_3_LENGTH {
        return Next::Unsupported("IEEE 802.3 length field, LLC frames are not decoded");
    }

    match EtherType::from_u16(etype) {
        Some(etype) => Next::Protocol(etype.into()),
        None => Next::Unknown(etype as u32),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_known_type_dispatches() {
        for etype in EtherType::iter() {
            assert!(matches!(next_protocol(etype as u16), Next::Protocol(_)));
        }
    }

    #[test]
    fn qinq_is_vlan() {
        assert_eq!(next_protocol(0x88a8), Next::Protocol(Protocol::VLAN));
    }

    #[test]
    fn length_field() {
        assert!(matches!(next_protocol(0x05dc), Next::Unsupported(_)));
        assert!(matches!(next_protocol(0x0026), Next::Unsupported(_)));
    }

    #[test]
    fn unknown() {
        assert_eq!(next_protocol(0x88cc), Next::Unknown(0x88cc));
    }
}
