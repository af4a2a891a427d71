use crate::metadata::{MetadataError, PhotoTags};
use exif::{Exif, In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn read_photo_tags(path: &Path) -> Result<PhotoTags, MetadataError> {
    let file = File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut buf = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut buf)
        .map_err(|source| MetadataError::Exif {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(PhotoTags {
        date_time_original: ascii_field(&exif, Tag::DateTimeOriginal),
        make: ascii_field(&exif, Tag::Make),
        model: ascii_field(&exif, Tag::Model),
    })
}

// Raw ASCII bytes rather than display_value(), which quotes the string.
fn ascii_field(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => {
            let first = parts.first()?;
            let text = String::from_utf8_lossy(first);
            Some(text.trim_end_matches('\0').to_string())
        }
        _ => Some(field.display_value().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = tempdir().expect("tempdir");
        let err = read_photo_tags(&temp.path().join("absent.jpg")).expect_err("must fail");
        assert!(matches!(err, MetadataError::Io { .. }));
    }

    #[test]
    fn file_without_exif_is_a_decode_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("plain.jpg");
        fs::write(&path, b"definitely not a jpeg").expect("write");
        let err = read_photo_tags(&path).expect_err("must fail");
        assert!(matches!(err, MetadataError::Exif { .. }));
    }

    fn ascii(tag: Tag, text: &str) -> exif::Field {
        exif::Field {
            tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        }
    }

    #[test]
    fn tags_are_read_from_a_tiff() {
        let make = ascii(Tag::Make, "Canon");
        let model = ascii(Tag::Model, "DIGITAL IXUS 70");
        let captured = ascii(Tag::DateTimeOriginal, "2014:03:02 10:15:30");
        let mut writer = exif::experimental::Writer::new();
        writer.push_field(&make);
        writer.push_field(&model);
        writer.push_field(&captured);
        let mut buf = std::io::Cursor::new(Vec::new());
        writer.write(&mut buf, false).expect("write tiff");

        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("photo.tif");
        fs::write(&path, buf.into_inner()).expect("write");

        let tags = read_photo_tags(&path).expect("tags");
        assert_eq!(tags.make.as_deref(), Some("Canon"));
        assert_eq!(tags.model.as_deref(), Some("DIGITAL IXUS 70"));
        assert_eq!(tags.date_time_original.as_deref(), Some("2014:03:02 10:15:30"));
    }

    #[test]
    fn absent_tag_is_none() {
        let make = ascii(Tag::Make, "NIKON CORPORATION");
        let mut writer = exif::experimental::Writer::new();
        writer.push_field(&make);
        let mut buf = std::io::Cursor::new(Vec::new());
        writer.write(&mut buf, true).expect("write tiff");

        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("stripped.tif");
        fs::write(&path, buf.into_inner()).expect("write");

        let tags = read_photo_tags(&path).expect("tags");
        assert_eq!(tags.make.as_deref(), Some("NIKON CORPORATION"));
        assert_eq!(tags.model, None);
        assert_eq!(tags.date_time_original, None);
    }
}
