use replay_core::DataReader;

use crate::{guess_format, Format};

#[test]
fn magic_beats_extension() {
    let tmv2 = 0x3256_4D54u32.to_le_bytes();
    assert_eq!(
        guess_format(Some("rec"), &DataReader::new(&tmv2)),
        Some(Format::TibiaMovie2)
    );

    let trp = 0x0050_5254u32.to_le_bytes();
    assert_eq!(
        guess_format(None, &DataReader::new(&trp)),
        Some(Format::TibiaReplay)
    );

    let legacy = [0x37u8, 0x13, 0xAA, 0xBB];
    assert_eq!(
        guess_format(None, &DataReader::new(&legacy)),
        Some(Format::TibiaReplay)
    );
}

#[test]
fn extensions_cover_every_format() {
    for (extension, format) in [
        ("cam", Format::Cam),
        ("rec", Format::Rec),
        ("recording", Format::Tibiacast),
        ("tmv", Format::TibiaMovie1),
        ("tmv2", Format::TibiaMovie2),
        ("trp", Format::TibiaReplay),
        ("ttm", Format::TibiaTimeMachine),
        ("yatc", Format::Yatc),
    ] {
        assert_eq!(
            guess_format(Some(extension), &DataReader::new(&[0u8; 4])),
            Some(format),
            "{extension}"
        );
    }

    assert_eq!(guess_format(Some("mkv"), &DataReader::new(&[0u8; 4])), None);
    assert_eq!(guess_format(None, &DataReader::new(&[0u8; 4])), None);
}
