use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xml_to_json::{ConverterSettings, Indent, XmlToJson};

/// A catalog of `n` entries whose repeated tags are interleaved, so every conversion has to
/// regroup arrays.
fn interleaved_catalog(n: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<catalog>\n");
    for i in 0..n {
        xml.push_str(&format!(
            "  <book id=\"bk{i}\"><author>Author &amp; Co #{i}</author><title>Title&#32;{i}</title></book>\n"
        ));
        xml.push_str(&format!("  <magazine issue='{i}'>Monthly\tissue</magazine>\n"));
    }
    xml.push_str("</catalog>\n");
    xml
}

fn criterion_benchmark(c: &mut Criterion) {
    let catalog = include_str!("../../samples/catalog.xml");
    let large = interleaved_catalog(1_000);

    let compact = XmlToJson::new();
    let indented = XmlToJson::new().with_configuration(ConverterSettings::new().indent(Indent::Spaces(2)));

    c.bench_function("convert sample catalog", |b| {
        b.iter(|| compact.convert(black_box(catalog)).unwrap())
    });

    c.bench_function("convert 1000 interleaved entries (compact)", |b| {
        b.iter(|| compact.convert(black_box(&large)).unwrap())
    });

    c.bench_function("convert 1000 interleaved entries (indented)", |b| {
        b.iter(|| indented.convert(black_box(&large)).unwrap())
    });

    c.bench_function("parse 1000 interleaved entries", |b| {
        b.iter(|| compact.parse(black_box(&large)).unwrap().len())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
