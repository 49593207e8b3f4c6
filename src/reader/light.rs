use {
    super::tag::{Tag, light, scene},
    crate::{
        NodeId,
        error::Error,
        light::{Light, LightType},
    },
    glam::Vec3,
    log::{trace, warn},
    std::io::{Read, Seek},
};

pub(super) fn read_light<R>(reader: &mut R, light: &mut Light) -> Result<(), Error>
where
    R: Read + Seek,
{
    while let Some(tag) = Tag::read(reader)? {
        if tag.is_end_of(scene::LIGHT) {
            trace!("Read {:?} light", light.kind);

            return Ok(());
        }

        match tag.identifier {
            light::TARGET_OBJECT_INDEX => {
                light.spot_target = NodeId::from_raw(tag.read_i32(reader)?)
            }
            light::COLOR => light.color = Vec3::from_array(tag.read_f32_array(reader)?),
            light::TYPE => {
                let value = tag.read_u32(reader)?;
                let Some(kind) = LightType::from_raw(value) else {
                    warn!("Unknown light type {value}");

                    return Err(Error::UnsupportedDataType {
                        context: "light type",
                        value,
                    });
                };

                light.kind = kind;
            }
            light::CONSTANT_ATTENUATION => light.constant_attenuation = tag.read_f32(reader)?,
            light::LINEAR_ATTENUATION => light.linear_attenuation = tag.read_f32(reader)?,
            light::QUADRATIC_ATTENUATION => light.quadratic_attenuation = tag.read_f32(reader)?,
            light::FALLOFF_ANGLE => light.falloff_angle = tag.read_f32(reader)?,
            light::FALLOFF_EXPONENT => light.falloff_exponent = tag.read_f32(reader)?,
            _ => tag.skip(reader)?,
        }
    }

    Err(Error::Truncated { context: "light" })
}

#[cfg(test)]
mod tests {
    use {
        super::read_light,
        crate::{
            Error, NodeId,
            light::{Light, LightType},
            reader::tag::{light, scene},
            writer::TagWriter,
        },
        glam::Vec3,
        std::io::Cursor,
    };

    fn spot_light_tags(writer: &mut TagWriter, reversed: bool) {
        let mut tags: [fn(&mut TagWriter); 8] = [
            |writer| writer.write_u32(light::TYPE, 2),
            |writer| writer.write_f32s(light::COLOR, &[1.0, 0.5, 0.25]),
            |writer| writer.write_i32(light::TARGET_OBJECT_INDEX, 4),
            |writer| writer.write_f32s(light::CONSTANT_ATTENUATION, &[0.5]),
            |writer| writer.write_f32s(light::LINEAR_ATTENUATION, &[0.25]),
            |writer| writer.write_f32s(light::QUADRATIC_ATTENUATION, &[0.125]),
            |writer| writer.write_f32s(light::FALLOFF_ANGLE, &[0.75]),
            |writer| writer.write_f32s(light::FALLOFF_EXPONENT, &[2.0]),
        ];

        if reversed {
            tags.reverse();
        }

        for tag in tags {
            tag(writer);
        }

        writer.end(scene::LIGHT);
    }

    #[test]
    fn tag_order_does_not_matter() {
        let mut lights = vec![];

        for reversed in [false, true] {
            let mut writer = TagWriter::default();
            spot_light_tags(&mut writer, reversed);

            let mut light = Light::default();
            read_light(&mut Cursor::new(writer.into_inner()), &mut light).unwrap();
            lights.push(light);
        }

        assert_eq!(lights[0], lights[1]);
        assert_eq!(lights[0].kind(), LightType::Spot);
        assert_eq!(lights[0].color(), Vec3::new(1.0, 0.5, 0.25));
        assert_eq!(lights[0].spot_target(), Some(NodeId(4)));
        assert_eq!(lights[0].falloff_exponent(), 2.0);
    }

    #[test]
    fn unknown_light_type() {
        let mut writer = TagWriter::default();
        writer.write_u32(light::TYPE, 7);
        writer.end(scene::LIGHT);

        let err = read_light(&mut Cursor::new(writer.into_inner()), &mut Light::default())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::UnsupportedDataType {
                context: "light type",
                value: 7
            }
        ));
    }

    #[test]
    fn missing_end_tag() {
        let mut writer = TagWriter::default();
        writer.write_u32(light::TYPE, 1);

        assert!(matches!(
            read_light(&mut Cursor::new(writer.into_inner()), &mut Light::default()),
            Err(Error::Truncated { context: "light" })
        ));
    }
}
