//! Display labels for model features

const FRIENDLY_LABELS: &[(&str, &str)] = &[
    ("T2M", "🌡️ Temperature (°C)"),
    ("RH2M", "💨 Humidity (%)"),
    ("T2MDEW", "🌡️ Dew Point (°C)"),
    ("temp_deviation_from_normal", "📊 Temp Deviation"),
    ("consecutive_dry_days", "☀️ Consecutive Dry Days"),
    ("Elevation_Data", "⛰️ Elevation"),
    ("Rainfall", "🌧️ Rainfall (mm)"),
    ("Wind_Speed", "💨 Wind Speed"),
    ("Soil_Moisture", "💧 Soil Moisture (%)"),
    ("Soil_pH", "🧪 Soil pH"),
    ("Organic_Matter", "🌱 Organic Matter"),
    ("Pest_Hotspots", "🐛 Pest Hotspots"),
    ("Weed_Coverage", "🌾 Weed Coverage"),
    ("Pest_Damage", "🐛 Pest Damage (%)"),
    ("Crop_Type_Rice", "🌾 Rice Crop"),
    ("Crop_Type_Wheat", "🌽 Wheat Crop"),
    ("Texture_Clay loam", "🏜️ Texture: Clay Loam"),
    ("Texture_Loam", "🏜️ Texture: Loam"),
    ("Texture_Sandy clay loam", "🏜️ Texture: Sandy Clay Loam"),
    ("Crop_Growth_Stage_2.0", "🌱 Growth Stage 2"),
    ("Crop_Growth_Stage_3.0", "🌱 Growth Stage 3"),
    ("Crop_Growth_Stage_4.0", "🌱 Growth Stage 4"),
    ("Season_Summer", "🌞 Summer Season"),
    ("Season_Winter", "❄️ Winter Season"),
    ("Season_Monsoon", "🌧️ Monsoon Season"),
    ("pest_damage_x_moisture", "🔗 Pest Damage × Moisture"),
    ("pest_damage_x_temp_deviation", "🔗 Pest Damage × Temp Deviation"),
    ("pest_hotspots_x_rainfall", "🔗 Pest Hotspots × Rainfall"),
];

/// Friendly label for a feature, or the raw name if none is registered
pub fn friendly_label(feature: &str) -> &str {
    FRIENDLY_LABELS
        .iter()
        .find(|(name, _)| *name == feature)
        .map(|(_, label)| *label)
        .unwrap_or(feature)
}
