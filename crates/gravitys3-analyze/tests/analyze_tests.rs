use chrono::{DateTime, TimeZone, Utc};
use gravitys3_analyze::{Summarizer, SummaryConfig, classify, extension_of, summarize};
use gravitys3_core::{BucketLocation, Category, NO_EXTENSION, ObjectRecord};
use strum::IntoEnumIterator;

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn location() -> BucketLocation {
    BucketLocation::primary("https://s3.wasabisys.com")
}

/// A mixed listing spread across prefixes, categories and years.
fn mixed_records(n: usize) -> Vec<ObjectRecord> {
    let names = [
        "clip.MOV", "a.braw", "b.cr3", "c.exr", "d.jpg", "e.wav", "f.prproj", "g.xmp", "h.pdf",
        "i.js", "j.zip", "README", "k.bin",
    ];
    (0..n)
        .map(|i| {
            let key = format!("top{}/sub{}/{}", i % 7, i % 3, names[i % names.len()]);
            let size = (i as u64 * 37) % 1000;
            if i % 5 == 0 {
                ObjectRecord::untimed(key, size)
            } else {
                ObjectRecord::new(key, size, date(2018 + (i % 4) as i32, 1 + (i % 12) as u32, 1))
            }
        })
        .collect()
}

#[test]
fn test_classify_fixed_table() {
    for category in Category::iter() {
        for ext in category.extensions() {
            assert_eq!(classify(ext), category, "extension {ext}");
            assert_eq!(classify(&ext.to_uppercase()), category, "extension {ext}");
        }
    }
}

#[test]
fn test_classify_unknown_is_other() {
    for ext in ["exe", "dmg", "iso", "mpg", "blend", "tar.gz"] {
        assert_eq!(classify(ext), Category::Other);
    }
    assert_eq!(classify(NO_EXTENSION), Category::NoExtension);
}

#[test]
fn test_empty_sequence() {
    let summary = summarize("empty", location(), Vec::<ObjectRecord>::new(), SummaryConfig::default());

    assert_eq!(summary.bucket, "empty");
    assert_eq!(summary.objects, 0);
    assert_eq!(summary.bytes, 0);
    assert!(summary.last_modified.is_none());
    assert!(summary.top_prefixes.is_empty());
    assert!(summary.ext_histogram.is_empty());
    assert!(summary.groups.is_empty());
    assert!(summary.year_histogram.is_empty());
    assert!(summary.depth2.is_empty());
    assert!(summary.samples.is_empty());
}

#[test]
fn test_reference_scenario() {
    let records = vec![
        ObjectRecord::new("a/b.mp4", 1000, date(2021, 1, 1)),
        ObjectRecord::new("a/c.srt", 10, date(2021, 6, 1)),
        ObjectRecord::untimed("z.other", 5),
    ];
    let summary = summarize(
        "media",
        location(),
        records,
        SummaryConfig::with_sample_cap(10),
    );

    assert_eq!(summary.objects, 3);
    assert_eq!(summary.bytes, 1015);
    assert_eq!(summary.last_modified, Some(date(2021, 6, 1)));

    let groups: Vec<_> = summary
        .groups
        .iter()
        .map(|(c, r)| (*c, r.count, r.bytes))
        .collect();
    assert_eq!(
        groups,
        [
            (Category::Video, 1, 1000),
            (Category::Sidecar, 1, 10),
            (Category::Other, 1, 5),
        ]
    );

    let prefixes: Vec<_> = summary
        .top_prefixes
        .iter()
        .map(|p| (p.prefix.as_str(), p.count, p.bytes))
        .collect();
    assert_eq!(prefixes, [("a", 2, 1010), ("z.other", 1, 5)]);

    assert_eq!(summary.year_histogram.len(), 1);
    let year = &summary.year_histogram["2021"];
    assert_eq!((year.count, year.bytes), (2, 1010));

    let samples: Vec<_> = summary.samples.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(samples, ["a/b.mp4", "a/c.srt", "z.other"]);

    let seconds: Vec<_> = summary
        .second_level("a")
        .iter()
        .map(|s| (s.second.as_str(), s.bytes))
        .collect();
    assert_eq!(seconds, [("b.mp4", 1000), ("c.srt", 10)]);
    assert!(summary.second_level("z.other").is_empty());
}

#[test]
fn test_category_totals_match_overall() {
    let summary = summarize("b", location(), mixed_records(500), SummaryConfig::default());

    let count: u64 = summary.groups.values().map(|r| r.count).sum();
    let bytes: u64 = summary.groups.values().map(|r| r.bytes).sum();
    assert_eq!(count, summary.objects);
    assert_eq!(bytes, summary.bytes);
}

#[test]
fn test_categories_sorted_by_bytes() {
    let summary = summarize("b", location(), mixed_records(300), SummaryConfig::default());
    let bytes: Vec<u64> = summary.groups.values().map(|r| r.bytes).collect();
    assert!(bytes.windows(2).all(|w| w[0] >= w[1]));
    assert!(summary.category(Category::NoExtension).is_some());
    assert!(summary.category(Category::Project).is_some());
}

#[test]
fn test_prefix_totals_cover_everything_when_untruncated() {
    let summary = summarize("b", location(), mixed_records(200), SummaryConfig::default());
    let bytes: u64 = summary.top_prefixes.iter().map(|p| p.bytes).sum();
    assert_eq!(summary.top_prefixes.len(), 7);
    assert_eq!(bytes, summary.bytes);
}

#[test]
fn test_year_histogram_only_timed_objects() {
    let records = mixed_records(100);
    let timed = records.iter().filter(|r| r.last_modified.is_some()).count() as u64;
    let newest = records.iter().filter_map(|r| r.last_modified).max();

    let summary = summarize("b", location(), records, SummaryConfig::default());
    let count: u64 = summary.year_histogram.values().map(|r| r.count).sum();

    assert_eq!(count, timed);
    assert!(count < summary.objects);
    assert_eq!(summary.last_modified, newest);

    let years: Vec<_> = summary.year_histogram.keys().cloned().collect();
    assert_eq!(years, ["2018", "2019", "2020", "2021"]);
}

#[test]
fn test_samples_are_listing_prefix() {
    let records = mixed_records(50);
    let summary = summarize("b", location(), records.clone(), SummaryConfig::with_sample_cap(7));

    assert_eq!(summary.samples.len(), 7);
    for (sample, record) in summary.samples.iter().zip(&records) {
        assert_eq!(sample.key, record.key);
        assert_eq!(sample.size, record.size);
    }

    let short = summarize("b", location(), records[..3].to_vec(), SummaryConfig::with_sample_cap(7));
    assert_eq!(short.samples.len(), 3);
}

#[test]
fn test_summary_is_deterministic() {
    let records = mixed_records(400);
    let first = summarize("b", location(), records.clone(), SummaryConfig::default());
    let second = summarize("b", location(), records, SummaryConfig::default());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_truncation_limits() {
    let records: Vec<_> = (0..60u64)
        .flat_map(|i| {
            [
                ObjectRecord::untimed(format!("p{i}/s{i}/file.e{i}"), i + 1),
                ObjectRecord::untimed(format!("wide/s{i}/file.e{i}"), i + 1),
            ]
        })
        .collect();

    let summary = summarize("b", location(), records, SummaryConfig::default());

    assert_eq!(summary.top_prefixes.len(), 20);
    assert_eq!(summary.ext_histogram.len(), 50);
    assert_eq!(summary.second_level("wide").len(), 20);
    assert_eq!(summary.depth2.len(), 61);

    assert_eq!(summary.top_prefixes[0].prefix, "wide");
    let bytes: Vec<u64> = summary.top_prefixes.iter().map(|p| p.bytes).collect();
    assert!(bytes.windows(2).all(|w| w[0] >= w[1]));

    let wide: Vec<u64> = summary.second_level("wide").iter().map(|s| s.bytes).collect();
    assert_eq!(wide[0], 60);
    assert!(wide.windows(2).all(|w| w[0] >= w[1]));

    let counts: Vec<u64> = summary.ext_histogram.iter().map(|(_, c)| *c).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_ties_keep_first_seen_order() {
    let records = vec![
        ObjectRecord::untimed("beta/x.txt", 10),
        ObjectRecord::untimed("alpha/x.mp4", 10),
        ObjectRecord::untimed("gamma/x.wav", 10),
        ObjectRecord::untimed("alpha/y.mp4", 0),
    ];
    let summary = summarize("b", location(), records, SummaryConfig::default());

    let prefixes: Vec<_> = summary.top_prefixes.iter().map(|p| p.prefix.as_str()).collect();
    assert_eq!(prefixes, ["beta", "alpha", "gamma"]);

    let exts: Vec<_> = summary.ext_histogram.iter().map(|(e, c)| (e.as_str(), *c)).collect();
    assert_eq!(exts, [("mp4", 2), ("txt", 1), ("wav", 1)]);
}

#[test]
fn test_flat_key_and_no_extension() {
    let records = vec![
        ObjectRecord::untimed("LICENSE", 3),
        ObjectRecord::untimed("docs/v1.2/CHANGELOG", 4),
    ];
    let summary = summarize("b", location(), records, SummaryConfig::default());

    assert_eq!(extension_of("docs/v1.2/CHANGELOG"), NO_EXTENSION);
    let none = summary.category(Category::NoExtension).unwrap();
    assert_eq!((none.count, none.bytes), (2, 7));
    assert_eq!(summary.ext_histogram, [("_none".into(), 2)]);

    assert!(summary.second_level("LICENSE").is_empty());
    assert_eq!(summary.second_level("docs")[0].second, "v1.2");
    assert_eq!(summary.depth2.len(), 1);
}

#[test]
fn test_incremental_matches_batch() {
    let records = mixed_records(120);
    let batch = summarize("b", location(), records.clone(), SummaryConfig::default());

    let mut summarizer = Summarizer::new("b", location(), SummaryConfig::default());
    for page in records.chunks(17) {
        summarizer.extend(page.iter().cloned());
    }
    assert_eq!(summarizer.objects(), 120);
    assert_eq!(summarizer.finish(), batch);
}

#[test]
fn test_summary_json_shape() {
    let records = vec![ObjectRecord::new("a/b.mp4", 1000, date(2021, 1, 1))];
    let summary = summarize("media", location(), records, SummaryConfig::default());
    let value = serde_json::to_value(&summary).unwrap();

    assert_eq!(value["bucket"], "media");
    assert_eq!(value["endpoint"], "https://s3.wasabisys.com");
    assert_eq!(value["region"], "us-east-1");
    assert_eq!(value["objects"], 1);
    assert!(value["bytes_human"].is_string());
    assert!(value["last_modified"].as_str().unwrap().starts_with("2021-01-01T00:00:00"));
    assert_eq!(value["ext_histogram"][0][0], "mp4");
    assert_eq!(value["ext_histogram"][0][1], 1);
    assert_eq!(value["groups"]["video"]["bytes"], 1000);
    assert_eq!(value["year_histogram"]["2021"]["count"], 1);
    assert_eq!(value["depth2"]["a"][0]["second"], "b.mp4");
    assert_eq!(value["top_prefixes"][0]["prefix"], "a");
    assert_eq!(value["samples"][0]["key"], "a/b.mp4");
}
