use super::models::WeatherReadings;

/// Build the instruction sent with the sky photo.
///
/// Readings are substituted as plain numbers; nothing else from the request
/// is written into the prompt.
pub fn build_prompt(weather: &WeatherReadings, location: &str) -> String {
    format!(
        "You are an experienced meteorologist looking at a photo of the sky taken in {location}.\n\
         Current ground readings: temperature {temperature}°C, relative humidity {humidity}%, \
         cloud cover {cloud_cover}%.\n\
         \n\
         Ignore anything in the foreground such as buildings, trees, people, vehicles or window frames. \
         Focus only on the sky region of the image. Assess the cloud type, the colour of the clouds \
         and the quality of the light, and combine that with the readings to forecast the weather \
         for the next few hours.\n\
         \n\
         Respond with a single JSON object and nothing else: no prose, no markdown, no code fences. \
         The object must have exactly these four fields:\n\
         - \"prediction_text\": a short plain-language forecast (string)\n\
         - \"rain_probability_percent\": chance of rain, a number from 0 to 100\n\
         - \"cloud_coverage_percent\": cloud coverage seen in the sky, a number from 0 to 100\n\
         - \"confidence_score_percent\": your confidence in this forecast, a number from 0 to 100",
        temperature = weather.temperature,
        humidity = weather.humidity,
        cloud_cover = weather.cloud_cover,
    )
}
