use image::GrayImage;

/// Offsets of a cross-shaped structuring element centred on the origin.
pub fn cross_kernel(width: u32, height: u32) -> Vec<(i32, i32)> {
    let (rx, ry) = (width as i32 / 2, height as i32 / 2);
    let horizontal = (-rx..=rx).map(|i| (i, 0));
    let vertical = (-ry..=ry).filter(|&i| i != 0).map(|i| (0, i));
    horizontal.chain(vertical).collect()
}

/// Binary erosion. Pixels outside the image count as background, so blobs
/// touching the border shrink from it as well.
pub fn erode(src: &GrayImage, kernel: &[(i32, i32)], iterations: u32) -> GrayImage {
    let mut output = src.clone();

    for _ in 0..iterations {
        output = erode_once(&output, kernel);
    }

    output
}

fn erode_once(current: &GrayImage, kernel: &[(i32, i32)]) -> GrayImage {
    let mut output = GrayImage::new(current.width(), current.height());
    let width = current.width() as i32;
    let height = current.height() as i32;

    for y in 0..height {
        for x in 0..width {
            let mut min_val = 255u8;

            for &(kx, ky) in kernel {
                let px = x + kx;
                let py = y + ky;

                if px >= 0 && px < width && py >= 0 && py < height {
                    let val = current.get_pixel(px as u32, py as u32)[0];
                    min_val = min_val.min(val);
                } else {
                    min_val = 0;
                }
                if min_val == 0 {
                    break;
                }
            }

            output.put_pixel(x as u32, y as u32, image::Luma([min_val]));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn cross_kernel_has_no_duplicate_center() {
        let k = cross_kernel(3, 3);
        assert_eq!(k.len(), 5);
        assert!(k.contains(&(0, 0)) && k.contains(&(-1, 0)) && k.contains(&(0, 1)));
    }

    #[test]
    fn erosion_shrinks_block_from_all_sides() {
        let mut img = GrayImage::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let kernel = cross_kernel(3, 3);
        let eroded = erode(&img, &kernel, 1);
        assert_eq!(eroded.get_pixel(0, 0)[0], 0);
        assert_eq!(eroded.get_pixel(2, 2)[0], 255);
        let on = eroded.pixels().filter(|p| p[0] > 0).count();
        assert_eq!(on, 9);
    }
}
