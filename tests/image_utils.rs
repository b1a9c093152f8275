use photoswipe::image_utils::*;
use std::io::Cursor;
use std::path::Path;

mod common;
use common::solid_image;

#[test]
fn to_color_image_matches_input_dimensions() {
    let img = solid_image(3, 5, [10, 20, 30, 255]);
    let color = to_color_image(&img);
    assert_eq!(color.size, [3, 5]);
    assert_eq!(color.pixels.len(), (img.width() * img.height()) as usize);
    assert_eq!(color.pixels[0].r(), 10);
    assert_eq!(color.pixels[0].g(), 20);
    assert_eq!(color.pixels[0].b(), 30);
}

#[test]
fn fit_dimensions_keeps_aspect_ratio() {
    assert_eq!(fit_dimensions(4000, 3000, 1000), (1000, 750));
    assert_eq!(fit_dimensions(3000, 4000, 1000), (750, 1000));
    assert_eq!(fit_dimensions(800, 600, 1000), (800, 600));
    assert_eq!(fit_dimensions(5000, 1, 100), (100, 1));
}

#[test]
fn downscale_for_display_preserves_colour() {
    let img = solid_image(200, 50, [255, 0, 0, 255]);
    let small = downscale_for_display(img, 40).unwrap();
    assert_eq!((small.width(), small.height()), (40, 10));
    let rgba = small.to_rgba8();
    assert_eq!(rgba.get_pixel(20, 5).0, [255, 0, 0, 255]);
}

#[test]
fn decode_image_reads_png_bytes() {
    let img = solid_image(6, 2, [1, 2, 3, 255]);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(Path::new("shot.png"), &bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (6, 2));
}

#[test]
fn decode_image_reports_garbage() {
    let err = decode_image(Path::new("shot.jpg"), b"nope").unwrap_err();
    assert!(err.to_string().contains("shot.jpg"));
}
