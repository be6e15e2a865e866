use glam::{Mat4, Vec2, Vec3};

/// Perspective camera on the +Z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 1000.0),
            fov: 70.0,
            near: 0.1,
            far: 3000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Camera {
    pub fn at_distance(distance: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, distance),
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Ray from the eye through a point in normalised device coordinates.
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Ray {
        let half_height = (self.fov.to_radians() * 0.5).tan();
        let view_direction = Vec3::new(ndc.x * half_height * aspect, ndc.y * half_height, -1.0);
        let direction = self
            .view_matrix()
            .inverse()
            .transform_vector3(view_direction)
            .normalize();
        Ray {
            origin: self.position,
            direction,
        }
    }
}

/// Finite square in the XY plane at z = 0 whose front face looks down +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePlane {
    pub half_extent: f32,
}

impl ReferencePlane {
    pub fn square(size: f32) -> Self {
        Self {
            half_extent: size / 2.0,
        }
    }

    /// Front-face hit point in plane XY, if the ray reaches the plane.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec2> {
        // Parallel rays and rays travelling away from the front face miss.
        if ray.direction.z >= -f32::EPSILON {
            return None;
        }
        let distance = -ray.origin.z / ray.direction.z;
        if !distance.is_finite() || distance < 0.0 {
            return None;
        }
        let hit = ray.origin + ray.direction * distance;
        let inside = hit.x.abs() <= self.half_extent && hit.y.abs() <= self.half_extent;
        inside.then(|| hit.truncate())
    }
}

impl Default for ReferencePlane {
    fn default() -> Self {
        Self::square(4500.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_hits_origin() {
        let camera = Camera::default();
        let ray = camera.ray_through(Vec2::ZERO, 16.0 / 9.0);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        let hit = ReferencePlane::default().intersect(&ray).expect("hit");
        assert!(hit.length() < 1e-2);
    }

    #[test]
    fn top_edge_matches_field_of_view() {
        let camera = Camera::default();
        let ray = camera.ray_through(Vec2::new(0.0, 1.0), 1.0);
        let hit = ReferencePlane::default().intersect(&ray).expect("hit");
        let expected = 1000.0 * 35f32.to_radians().tan();
        assert!((hit.y - expected).abs() < 0.5, "hit={hit:?}");
        assert!(hit.x.abs() < 1e-2);
    }

    #[test]
    fn parallel_and_receding_rays_miss() {
        let plane = ReferencePlane::default();
        let parallel = Ray {
            origin: Vec3::new(0.0, 0.0, 1000.0),
            direction: Vec3::X,
        };
        assert_eq!(plane.intersect(&parallel), None);
        let receding = Ray {
            origin: Vec3::new(0.0, 0.0, 1000.0),
            direction: Vec3::Z,
        };
        assert_eq!(plane.intersect(&receding), None);
    }

    #[test]
    fn hits_outside_extent_miss() {
        let camera = Camera::default();
        // Ultra-wide viewport: the right edge lands far beyond 2250 units.
        let ray = camera.ray_through(Vec2::new(1.0, 0.0), 6.0);
        assert_eq!(ReferencePlane::default().intersect(&ray), None);
    }
}
