use geo::{polygon, Geometry};
use geomap_core::models::{Dataset, LegendLocation, StyleConfig, Value};
use geomap_core::{GeomapError, RenderMode};
use geomap_render::{parse_style_instructions, MapResponse, MapResponseGenerator};

fn provinces() -> Dataset {
    let names = ["Aceh", "Bali", "Banten", "Jambi"];
    let records = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let x = 95.0 + i as f64 * 2.0;
            let g = Geometry::Polygon(polygon![
                (x: x, y: -8.0),
                (x: x + 2.0, y: -8.0),
                (x: x + 2.0, y: -6.0),
                (x: x, y: -6.0),
                (x: x, y: -8.0),
            ]);
            let population = if i == 2 { Value::Null } else { Value::Number(1_000.0 * (i + 1) as f64) };
            (
                Some(g),
                vec![("name".to_string(), Value::Text(name.to_string())), ("population".to_string(), population)],
            )
        })
        .collect();
    Dataset::from_records("provinces", 4326, records)
}

#[test]
fn test_styled_static_map_from_message() {
    let message = "map population, legend to right, show grid, title Population of Indonesia.";
    let styles = parse_style_instructions(message);
    assert_eq!(styles.legend_loc, LegendLocation::UpperRight);
    assert!(styles.grid);

    let generator = MapResponseGenerator::new(None).unwrap();
    let mut dataset = provinces();
    let response = generator
        .generate(&mut dataset, &["population".to_string()], &styles, message)
        .unwrap();

    match response {
        MapResponse::Image(png) => {
            assert!(png.width >= png.height);
            assert!(png.data_uri().starts_with("data:image/png;base64,"));
        }
        MapResponse::Html(_) => panic!("expected a static image"),
    }
}

#[test]
fn test_interactive_categorical_map() {
    let generator = MapResponseGenerator::new(None).unwrap();
    let mut dataset = provinces();
    let response = generator
        .generate(&mut dataset, &["name".to_string()], &StyleConfig::default(), "interactive map of names")
        .unwrap();
    let html = response.as_html().unwrap();
    for name in ["Aceh", "Bali", "Banten", "Jambi"] {
        assert!(html.contains(name));
    }
    assert!(html.contains("L.Control.Draw"));
}

#[test]
fn test_heatmap_of_polygon_centroids() {
    let generator = MapResponseGenerator::new(None).unwrap();
    let mut dataset = provinces();
    let response = generator
        .generate(&mut dataset, &["population".to_string()], &StyleConfig::default(), "population density")
        .unwrap();
    let html = response.as_html().unwrap();
    assert!(html.contains("L.heatLayer("));
    assert!(html.contains(",2000.0]"));
}

#[test]
fn test_missing_column_lists_available() {
    let generator = MapResponseGenerator::new(None).unwrap();
    let mut dataset = provinces();
    let err = generator
        .generate(&mut dataset, &["gdp".to_string()], &StyleConfig::default(), "map gdp")
        .unwrap_err();
    assert!(!matches!(err, GeomapError::Render { mode: RenderMode::Static, .. }));
    assert_eq!(err.to_string(), "Column 'gdp' not found. Available columns: name, population");
}
