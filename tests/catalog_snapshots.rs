use weather_diorama::{
    domain::weather::Condition,
    scene::catalog::{self, DisplayScale, TERRAINS},
};

fn terrain_table() -> String {
    let mut lines = Vec::new();
    for (index, terrain) in TERRAINS.iter().enumerate() {
        let materials = catalog::terrain_tints(index, true, Condition::Clear)
            .expect("tints")
            .len();
        lines.push(format!(
            "{}: grid {}x{} ({} slots), radius {:.2}, layer {:.2}, {} materials",
            terrain.id,
            terrain.grid_columns(),
            terrain.grid_rows(),
            terrain.slot_count(),
            terrain.stage_radius,
            terrain.cloud_layer.y,
            materials
        ));
        for scale in DisplayScale::ALL {
            let placement = catalog::stage_placement(index, scale).expect("placement");
            lines.push(format!(
                "  {scale:?}: y={:.2} scale={:.2}",
                placement.offset.y, placement.scale
            ));
        }
    }
    lines.join("\n")
}

fn selection_table() -> String {
    let mut lines = Vec::new();
    for daylight in [true, false] {
        for condition in [Condition::Clear, Condition::Rain, Condition::Snow] {
            lines.push(format!(
                "{} {:?}: tint {}, precipitation alpha {:.1}",
                if daylight { "day" } else { "night" },
                condition,
                catalog::tint_index(daylight, condition),
                catalog::precipitation_color(daylight, condition).a
            ));
        }
    }
    lines.join("\n")
}

#[test]
fn terrain_catalog_table() {
    insta::assert_snapshot!(terrain_table(), @r"
    field: grid 5x7 (35 slots), radius 0.15, layer 0.10, 4 materials
      Small: y=0.00 scale=0.40
      Medium: y=-0.50 scale=10.00
      Large: y=-2.00 scale=30.00
    village: grid 3x5 (15 slots), radius 0.12, layer 0.09, 3 materials
      Small: y=0.00 scale=0.50
      Medium: y=-0.50 scale=12.00
      Large: y=-2.00 scale=36.00
    town: grid 7x9 (63 slots), radius 0.18, layer 0.12, 5 materials
      Small: y=0.00 scale=0.33
      Medium: y=-0.60 scale=8.00
      Large: y=-2.50 scale=25.00
    ");
}

#[test]
fn tint_selection_table() {
    insta::assert_snapshot!(selection_table(), @r"
    day Clear: tint 0, precipitation alpha 0.5
    day Rain: tint 1, precipitation alpha 0.5
    day Snow: tint 1, precipitation alpha 1.0
    night Clear: tint 2, precipitation alpha 0.5
    night Rain: tint 3, precipitation alpha 0.5
    night Snow: tint 3, precipitation alpha 1.0
    ");
}
